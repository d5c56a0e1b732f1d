//! `vidres normalize` – show how an input is interpreted.

use anyhow::Result;
use vidres_core::url_model;

pub fn run_normalize(input: &str) -> Result<()> {
    let n = url_model::normalize(input)?;
    println!("id:     {}", n.id);
    println!("url:    {}", n.canonical_url());
    match n.start_offset {
        Some(secs) => println!("start:  {}s", secs),
        None => println!("start:  -"),
    }
    Ok(())
}
