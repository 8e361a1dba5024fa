use argp::FromArgs;

/// Inspect Lisa Workshop object/executable files.
#[derive(FromArgs, Debug)]
pub struct TopLevel {
    /// Be verbose (repeat for more detail).
    #[argp(switch, short = 'v')]
    pub verbose: u8,

    /// Path to the object file to read.
    #[argp(positional)]
    pub path: String,

    #[argp(subcommand)]
    pub nested: Command,
}

#[derive(FromArgs, Debug)]
#[argp(subcommand)]
pub enum Command {
    Dump(DumpArgs),
    Extract(ExtractArgs),
}

/// Print every block in the file.
#[derive(FromArgs, Debug)]
#[argp(subcommand, name = "dump")]
pub struct DumpArgs {}

/// Write each module's unpacked code to its own file.
#[derive(FromArgs, Debug)]
#[argp(subcommand, name = "extract")]
pub struct ExtractArgs {}
