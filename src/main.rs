fn main() -> Result<(), Box<dyn std::error::Error>> {
    llm_chat::cli::main()
}
