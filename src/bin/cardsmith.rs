use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cardsmith", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one or both sides of a card as PNG files.
    Render(RenderArgs),
    /// Parse and validate a template without rendering it.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Template JSON.
    #[arg(long)]
    template: PathBuf,

    /// Data record JSON (one object of field values).
    #[arg(long)]
    data: PathBuf,

    /// Portrait bound to `photo` image layers.
    #[arg(long)]
    photo: Option<PathBuf>,

    /// Which side(s) to render.
    #[arg(long, value_enum, default_value_t = SideChoice::Both)]
    side: SideChoice,

    /// Output directory for `<template>_<side>.png`.
    #[arg(long)]
    out_dir: PathBuf,

    /// Renderer configuration JSON. `CARDSMITH_*` environment variables override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print which font each text layer resolved to.
    #[arg(long)]
    dump_fonts: bool,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Template JSON.
    #[arg(long)]
    template: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SideChoice {
    Front,
    Back,
    Both,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn read_template(path: &Path) -> anyhow::Result<cardsmith::Template> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read template '{}'", path.display()))?;
    let template = cardsmith::Template::from_json_str(&json)
        .with_context(|| format!("parse template '{}'", path.display()))?;
    Ok(template)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<cardsmith::RenderConfig> {
    let base = match path {
        Some(p) => cardsmith::RenderConfig::from_json_file(p)?,
        None => cardsmith::RenderConfig::default(),
    };
    Ok(base.with_env()?)
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let template = read_template(&args.template)?;
    for kind in [cardsmith::SideKind::Front, cardsmith::SideKind::Back] {
        let side = template.side(kind);
        let unsupported = side
            .layers
            .iter()
            .filter(|slot| matches!(slot, cardsmith::LayerSlot::Unsupported { .. }))
            .count();
        eprintln!(
            "{kind}: {} layers ({} visible, {unsupported} unsupported), background: {}",
            side.layers.len(),
            side.paint_order().len(),
            side.background_image.as_deref().unwrap_or("none"),
        );
        for slot in &side.layers {
            if let cardsmith::LayerSlot::Invalid { id, type_tag, error, .. } = slot {
                eprintln!("warning: {kind} {type_tag} layer '{id}' will not render: {error}");
            }
        }
    }
    eprintln!(
        "template '{}' ({}x{}) is valid",
        template.id, template.canvas.width, template.canvas.height
    );
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let template = read_template(&args.template)?;

    let data = std::fs::read_to_string(&args.data)
        .with_context(|| format!("read data record '{}'", args.data.display()))?;
    let record = cardsmith::DataRecord::from_json_str(&data)
        .with_context(|| format!("parse data record '{}'", args.data.display()))?;

    let photo = args
        .photo
        .as_deref()
        .map(|p| cardsmith::load_image_file(p, None))
        .transpose()
        .context("load portrait")?;

    let compositor = cardsmith::Compositor::new(&config);
    if args.dump_fonts {
        dump_font_diagnostics(&template, compositor.fonts());
    }

    let sides = match args.side {
        SideChoice::Front => vec![cardsmith::SideKind::Front],
        SideChoice::Back => vec![cardsmith::SideKind::Back],
        SideChoice::Both => vec![cardsmith::SideKind::Front, cardsmith::SideKind::Back],
    };

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let stem = if template.id.is_empty() {
        "card".to_string()
    } else {
        template.id.clone()
    };
    for kind in sides {
        let rendered = compositor.render(&template, &record, photo.as_ref(), kind)?;
        for report in &rendered.layers {
            if let cardsmith::LayerOutcome::Failed(msg) = &report.outcome {
                eprintln!("warning: {} layer '{}' failed: {msg}", report.kind, report.layer_id);
            }
        }

        let out = args.out_dir.join(format!("{stem}_{kind}.png"));
        let png = cardsmith::encode_png(&rendered.image)?;
        std::fs::write(&out, png).with_context(|| format!("write png '{}'", out.display()))?;
        eprintln!(
            "wrote {} ({} of {} layers painted)",
            out.display(),
            rendered.painted_count(),
            rendered.layers.len()
        );
    }
    Ok(())
}

fn dump_font_diagnostics(template: &cardsmith::Template, fonts: &cardsmith::FontManager) {
    eprintln!("text font diagnostics ({} faces loaded):", fonts.face_count());
    for kind in [cardsmith::SideKind::Front, cardsmith::SideKind::Back] {
        for slot in &template.side(kind).layers {
            let cardsmith::LayerSlot::Known(cardsmith::Layer::Text(t)) = slot else {
                continue;
            };
            let font = fonts.get_font(&t.font_family, t.font_size, t.font_weight);
            eprintln!(
                "- {kind}/{}: requested='{}' weight={} resolved='{}' via {:?}",
                t.common.id,
                t.font_family,
                t.font_weight.0,
                font.family(),
                font.resolution()
            );
        }
    }
}
