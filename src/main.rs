use anyhow::Result;

fn main() -> Result<()> {
    tonegrid::repl::start()
}
