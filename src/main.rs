use clap::Parser;
use miette::Result;
use sanity_lab::cli::commands;
use sanity_lab::cli::{Cli, Commands};
use sanity_lab::core::init_logging;

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match cli.command {
        Commands::New(args) => commands::new::run(args, &cli.global),
        Commands::Validate(args) => commands::validate::run(args, &cli.global),
        Commands::Run(args) => commands::run::run(args, &cli.global),
        Commands::Share(args) => commands::share::run(args, &cli.global),
        Commands::Report(args) => commands::report::run(args, &cli.global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
