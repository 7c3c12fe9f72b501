pub mod clipboard;
pub mod diagnostics;
pub mod logging;
pub mod scroll;
pub mod url;
#[cfg(test)]
pub mod test_utils;
