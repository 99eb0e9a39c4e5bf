use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    ecopack completions bash > ~/.bash_completion.d/ecopack\n\n\
                  Generate zsh completions:\n    ecopack completions zsh > ~/.zfunc/_ecopack\n\n\
                  Generate fish completions:\n    ecopack completions fish > ~/.config/fish/completions/ecopack.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
