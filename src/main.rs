use std::error::Error as _;

use xdsctl::error::Error;

fn main() {
    match xdsctl::cmd::run() {
        Ok(()) => {}
        Err(Error::Parse(e)) => e.exit(),
        Err(e) => {
            eprintln!("Error: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            std::process::exit(1);
        }
    }
}
