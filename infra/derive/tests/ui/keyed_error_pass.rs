use keyed_derive::keyed_error;
use std::borrow::Cow;

#[keyed_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn open() -> Result<()> {
    std::fs::metadata("/definitely/missing").context("probing")?;
    Err("unreachable".into())
}

fn main() {
    let _ = open();
}
