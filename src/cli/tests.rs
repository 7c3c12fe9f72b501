use super::*;

mod test_helpers {
    use super::*;

    pub(super) fn parse_args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv)
            .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
    }

    pub(super) fn assert_optional_flag_value(
        actual: Option<&str>,
        expected: Option<&str>,
        flag_name: &str,
        argv: &[&str],
    ) {
        assert_eq!(
            actual, expected,
            "unexpected value for {flag_name} when parsing argv={argv:?}"
        );
    }
}

use test_helpers::{assert_optional_flag_value, parse_args};

#[test]
fn chat_is_the_default_command() {
    let argv = ["llm-chat"];
    let args = parse_args(&argv);
    assert!(args.command.is_none());
    assert_optional_flag_value(args.model.as_deref(), None, "--model", &argv);
    assert_optional_flag_value(args.host.as_deref(), None, "--host", &argv);
}

#[test]
fn model_flag_without_value_requests_listing() {
    for argv in [&["llm-chat", "-m"][..], &["llm-chat", "chat", "--model"][..]] {
        let args = parse_args(argv);
        assert_optional_flag_value(args.model.as_deref(), Some(""), "--model", argv);
    }

    let argv = ["llm-chat", "-m", "llama3.2:latest"];
    let args = parse_args(&argv);
    assert_optional_flag_value(args.model.as_deref(), Some("llama3.2:latest"), "--model", &argv);
}

#[test]
fn global_options_apply_after_subcommand() {
    let argv = ["llm-chat", "chat", "--host", "gpu-box:11434", "-l", "chat.log"];
    let args = parse_args(&argv);
    assert!(matches!(args.command, Some(Commands::Chat)));
    assert_optional_flag_value(args.host.as_deref(), Some("gpu-box:11434"), "--host", &argv);
    assert_optional_flag_value(args.log.as_deref(), Some("chat.log"), "--log", &argv);
}

#[test]
fn say_collects_prompt_words() {
    let args = parse_args(&["llm-chat", "say", "why", "is", "the", "sky", "-blue"]);
    match args.command {
        Some(Commands::Say { prompt }) => {
            assert_eq!(prompt.join(" "), "why is the sky -blue");
        }
        _ => panic!("expected say subcommand"),
    }
}

#[test]
fn set_accepts_multi_word_values_and_bare_form() {
    let args = parse_args(&["llm-chat", "set", "system-prompt", "Answer", "briefly."]);
    match args.command {
        Some(Commands::Set { key, value }) => {
            assert_eq!(key.as_deref(), Some("system-prompt"));
            assert_eq!(value, vec!["Answer", "briefly."]);
        }
        _ => panic!("expected set subcommand"),
    }

    let args = parse_args(&["llm-chat", "set"]);
    match args.command {
        Some(Commands::Set { key, value }) => {
            assert!(key.is_none());
            assert!(value.is_empty());
        }
        _ => panic!("expected bare set subcommand"),
    }
}

#[test]
fn unset_requires_key() {
    assert!(Args::try_parse_from(["llm-chat", "unset"]).is_err());
    let args = parse_args(&["llm-chat", "unset", "host-address"]);
    assert!(matches!(
        args.command,
        Some(Commands::Unset { key }) if key == "host-address"
    ));
}

#[test]
fn sessions_subcommand_parses() {
    let args = parse_args(&["llm-chat", "sessions"]);
    assert!(matches!(args.command, Some(Commands::Sessions)));
}
