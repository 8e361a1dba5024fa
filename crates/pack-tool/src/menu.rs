use argp::FromArgs;

/// Compress or decompress a stream with the Lisa code compression codec.
#[derive(FromArgs, Debug)]
pub struct TopLevel {
    /// Be verbose (repeat for more detail).
    #[argp(switch, short = 'v')]
    pub verbose: u8,

    #[argp(subcommand)]
    pub nested: Command,
}

#[derive(FromArgs, Debug)]
#[argp(subcommand)]
pub enum Command {
    Pack(PackArgs),
    Unpack(UnpackArgs),
}

/// Compress a stream. `-` (the default) means stdin/stdout.
#[derive(FromArgs, Debug)]
#[argp(subcommand, name = "pack")]
pub struct PackArgs {
    /// input file, or `-` for stdin.
    #[argp(positional)]
    pub infile: Option<String>,

    /// output file, or `-` for stdout.
    #[argp(positional)]
    pub outfile: Option<String>,
}

/// Decompress a stream. `-` (the default) means stdin/stdout.
#[derive(FromArgs, Debug)]
#[argp(subcommand, name = "unpack")]
pub struct UnpackArgs {
    /// input file, or `-` for stdin.
    #[argp(positional)]
    pub infile: Option<String>,

    /// output file, or `-` for stdout.
    #[argp(positional)]
    pub outfile: Option<String>,
}
