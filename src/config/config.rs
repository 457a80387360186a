pub struct Config {
    /// If true, the token stream is printed after scanning.
    pub dump_tokens: bool,
    /// If true, the AST is printed after parsing.
    pub dump_ast: bool,
}

impl Config {
    pub fn default() -> Self {
        Self {
            dump_tokens: false,
            dump_ast: false,
        }
    }

    pub fn test() -> Self {
        Self {
            dump_tokens: false,
            dump_ast: false,
        }
    }

    pub fn debug() -> Self {
        Self {
            dump_tokens: true,
            dump_ast: true,
        }
    }
}
