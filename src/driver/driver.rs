use std::fs;

use tracing::info;

use crate::{
    ast::{Ast, Printer},
    config::{Config, Options, Project},
    error::Res,
    parser::parse,
    token::{Source, display_tokens, scan},
    types::check,
};

/// Compiler entry point and main driver. Runs the front end over the
/// project source and returns the checked AST for the back end.
pub fn compile(project: &Project, options: &Options, config: &Config) -> Result<Ast, String> {
    let src = match fs::read(&project.src) {
        Err(_) => return Err(format!("failed to read file: '{}'", project.src)),
        Ok(bytes) => bytes,
    };

    let source = Source::new(project.src.clone(), src);
    let ast = front_end(&source, config).map_err(|err| err.render(&source))?;

    if options.debug_mode {
        Printer::print(&ast);
    }

    Ok(ast)
}

/// Scan, parse and check a single source. Stages run to completion in
/// order, the first error anywhere aborts the run.
pub fn front_end(source: &Source, config: &Config) -> Res<Ast> {
    info!("compiling '{}'", source.filepath);

    let tokens = scan(source, config)?;
    if config.dump_tokens {
        println!("{}", display_tokens(&tokens));
    }

    let ast = parse(tokens, config)?;
    if config.dump_ast {
        Printer::print(&ast);
    }

    check(&ast, config)?;
    Ok(ast)
}
