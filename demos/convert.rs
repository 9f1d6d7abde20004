//! Converts a document from one format to another.
//!
//! Reads standard input, writes standard output:
//!
//! ```text
//! echo '{"name":"svc","ports":[80,443]}' | cargo run --example convert -- json yaml
//! ```
//!
//! Without arguments, converts a built-in sample to every format.

use std::error::Error;
use std::io::{self, Read, Write};
use table_codec::{table, Format, Options, Value};

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.as_slice() {
        [from, to] => {
            let from: Format = from.parse()?;
            let to: Format = to.parse()?;
            convert(from, to)
        }
        [] => {
            showcase();
            Ok(())
        }
        _ => Err("usage: convert <from> <to>".into()),
    }
}

fn convert(from: Format, to: Format) -> Result<(), Box<dyn Error>> {
    let mut input = Vec::new();
    io::stdin().read_to_end(&mut input)?;

    let value = from.deserialize(&input)?;
    let table = match value {
        Value::Table(table) => table,
        other => return Err(format!("{} document is a {}, not a table", from, other.type_name()).into()),
    };

    let output = to.serialize_with_options(&table, &Options::pretty())?;
    io::stdout().write_all(&output)?;
    Ok(())
}

fn showcase() {
    let service = table! {
        "name" => "inventory",
        "replicas" => 3,
        "ports" => table![8080, 8443],
        "labels" => table! {"team" => "storage", "tier" => "backend"},
    };

    for format in [Format::Json, Format::Yaml, Format::Toml] {
        match format.serialize_with_options(&service, &Options::pretty()) {
            Ok(bytes) => println!("{}:\n{}\n", format, String::from_utf8_lossy(&bytes)),
            Err(e) => eprintln!("{}: {}", format, e),
        }
    }

    // XML needs an element record rather than a free-form table
    let record = table! {
        "tag" => "service",
        "attr" => table! {"name" => "inventory"},
        "children" => table![
            table! {"tag" => "port", "text" => 8080},
            table! {"tag" => "port", "text" => 8443},
        ],
    };
    match Format::Xml.serialize(&record) {
        Ok(bytes) => println!("xml:\n{}", String::from_utf8_lossy(&bytes)),
        Err(e) => eprintln!("xml: {}", e),
    }
}
