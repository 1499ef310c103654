use net_access::{cli, error::Result, run};

fn main() -> Result<()> {
    let args = cli::get_args()?;
    run(args)
}
