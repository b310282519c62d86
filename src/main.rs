use anyhow::Context;
use clap::Parser;
use odb_devtools::{
    cli::{render_report, view_request, Args, Commands},
    config::DevtoolsConfig,
    includes::fix_includes,
    logging::init_logger,
    platform::current_executor,
    viewer,
};

fn run(args: Args) -> anyhow::Result<()> {
    let config = DevtoolsConfig::load(args.config.as_ref()).context("loading configuration")?;

    match args.command {
        Commands::View {
            filename,
            line_number,
            ast_type,
            print,
        } => {
            let request = view_request(filename, line_number, &ast_type)?;
            let plan = viewer::plan(&request, &config.viewer).with_context(|| {
                format!(
                    "locating test at {}:{}",
                    request.file.display(),
                    request.line
                )
            })?;

            if print {
                let payload = plan.payload();
                if payload.ends_with('\n') {
                    print!("{}", payload);
                } else {
                    println!("{}", payload);
                }
                return Ok(());
            }

            viewer::launch(&plan, current_executor().as_ref()).context("running viewer")?;
        }
        Commands::FixIncludes {
            root,
            dry_run,
            format,
        } => {
            let report = fix_includes(&root, &config.includes, dry_run)
                .with_context(|| format!("fixing includes under {}", root.display()))?;
            print!("{}", render_report(&report, format)?);
        }
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);

    match run(args) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
