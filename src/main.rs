use clap::Parser;
use formfill::cli::commands::{cmd_detect, cmd_fill, cmd_fill_ai, cmd_route, cmd_templates};
use formfill::cli::config::{load_config, Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    let endpoint = cli.gemini_endpoint.as_deref();
    let api_key = cli.gemini_api_key.as_deref();
    let store = cli.store.as_deref();

    match cli.command {
        Commands::Detect { snapshot, url } => {
            cmd_detect(snapshot.as_deref(), url.as_deref(), cli.verbose)?;
        }
        Commands::Fill {
            snapshot,
            url,
            template,
            out,
            seed,
        } => {
            cmd_fill(
                snapshot.as_deref(),
                url.as_deref(),
                template.as_deref(),
                out.as_deref(),
                seed,
                store,
                &config,
                cli.verbose,
            )?;
        }
        Commands::FillAi {
            snapshot,
            url,
            template,
            out,
            seed,
        } => {
            cmd_fill_ai(
                snapshot.as_deref(),
                url.as_deref(),
                template.as_deref(),
                out.as_deref(),
                seed,
                store,
                endpoint,
                api_key,
                &config,
                cli.verbose,
            )?;
        }
        Commands::Templates {
            export,
            import,
            delete,
        } => {
            cmd_templates(
                export.as_deref(),
                import.as_deref(),
                delete.as_deref(),
                store,
                &config,
            )?;
        }
        Commands::Route { snapshot } => {
            cmd_route(&snapshot, store, endpoint, api_key, &config)?;
        }
    }

    Ok(())
}
