mod cli;

use clap::Parser;

use cli::{Args, CliError, Command, RenderArgs};
use video2ascii::config::Config;
use video2ascii::logging::{init_log, level_for_verbosity};

fn run(args: Args) -> Result<(), CliError> {
    let config_path = args.config.as_deref();

    // Config actions read the file themselves.
    let command = match args.command {
        Command::Config { action } => return cli::handle_config_action(action, config_path),
        command => command,
    };

    let options = Config::load(config_path)?.to_options();

    match command {
        Command::Grid {
            size,
            image,
            columns,
            font_size,
            max_width,
        } => cli::run_grid(&options, size, image.as_deref(), columns, font_size, max_width),
        Command::Atlas {
            charset,
            custom,
            font,
            font_size,
            output,
        } => cli::run_atlas(&options, charset, custom, font.as_deref(), font_size, &output),
        Command::Charsets => {
            cli::list_charsets();
            Ok(())
        }
        Command::Detect { src } => {
            cli::detect(&src);
            Ok(())
        }
        Command::Render {
            image,
            frames,
            columns,
            charset,
            dither,
            dialect,
            font,
            mouse,
            ripple,
        } => cli::run_render(
            &options,
            &image,
            RenderArgs {
                frames,
                columns,
                charset,
                dither,
                dialect,
                font,
                mouse,
                ripple,
            },
        ),
        Command::Config { .. } => Ok(()),
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = init_log(level_for_verbosity(args.verbose)) {
        eprintln!("Warning: {}", e);
    }

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
