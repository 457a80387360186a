use std::fmt::Display;

use crate::{
    ast::Ast,
    config::Config,
    error::Res,
    parser::parse,
    token::{Source, Token, scan},
    types::check,
};

pub fn compare_string_lines_or_panic(ina: String, inb: String) {
    let a: Vec<&str> = ina.trim().split('\n').collect();
    let b: Vec<&str> = inb.trim().split('\n').collect();
    assert_eq!(
        a.len(),
        b.len(),
        "number of lines must be equal, got\n{}\nand\n{}",
        ina,
        inb,
    );

    for (i, line) in a.iter().enumerate() {
        assert_eq!(line.trim(), b.get(i).unwrap().trim());
    }
}

pub fn must<T, V: Display>(res: Result<T, V>) -> T {
    res.unwrap_or_else(|err| panic!("unexpected error: {}", err))
}

pub fn scan_string(src: &str) -> Res<Vec<Token>> {
    let source = Source::new_from_string(src);
    scan(&source, &Config::test())
}

pub fn parse_string(src: &str) -> Res<Ast> {
    scan_string(src).and_then(|toks| parse(toks, &Config::test()))
}

pub fn check_string(src: &str) -> Res<()> {
    parse_string(src).and_then(|ast| check(&ast, &Config::test()))
}
