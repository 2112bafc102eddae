use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "sbunpack")]
#[command(version)]
#[command(about = "Recover Scratch projects from packaged zips, executables and HTML pages", long_about = None)]
#[command(after_help = "Examples:\n  \
  sbunpack packaged.html           recover the embedded project next to the input\n  \
  sbunpack -o out.sb3 packaged.zip recover into a chosen path\n  \
  sbunpack -p https://example.com/game.html > project.sb3")]
pub struct Cli {
    /// Packaged artifact path or HTTP URL
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Write the recovered project to this path
    #[arg(short = 'o', value_name = "FILE")]
    pub output: Option<String>,

    /// Write the recovered project to stdout, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Overwrite an existing output file
    #[arg(short = 'f')]
    pub force: bool,

    /// Quiet mode
    #[arg(short = 'q')]
    pub quiet: bool,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.file.starts_with("http://") || self.file.starts_with("https://")
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet || self.pipe
    }
}
