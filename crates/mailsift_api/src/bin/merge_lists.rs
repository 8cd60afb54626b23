//! Merge two list files into one sorted, deduplicated output file.
//!
//! ```text
//! merge-lists <file1.txt> <file2.txt> <output.txt>
//! ```

use anyhow::{bail, Context, Result};
use mailsift_core::loader::FileLoader;
use std::io::Write;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage: merge-lists <file1.txt> <file2.txt> <output.txt>");
        eprintln!("Example: merge-lists data/disposable.txt data/free.txt merged_domains.txt");
        bail!("expected exactly 3 arguments, got {}", args.len() - 1);
    }

    let loader = FileLoader::new();
    let mut items = loader
        .load_from_files(&[&args[1], &args[2]])
        .context("failed to load input lists")?;
    items.sort();

    let mut output = std::fs::File::create(&args[3])
        .with_context(|| format!("failed to create {}", args[3]))?;
    for item in &items {
        writeln!(output, "{}", item)?;
    }

    println!("Successfully merged {} and {} into {}", args[1], args[2], args[3]);
    println!("Total unique items: {}", items.len());
    Ok(())
}
