use anyhow::Result;

fn main() -> Result<()> {
    nikkari_cli::main_entry()
}
