use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use tracing::{info, warn, Level};

use softraster::codec::{self, SaveMode};
use softraster::config::parse_resolution;
use softraster::input::route_events;
use softraster::sketch::{HelpPanel, Sketch};
use softraster::{Bitmap, Pixel, RenderConfig, Renderer, SdlBackend, SdlDisplay};

/// Draw anti-aliased polylines with the mouse.
#[derive(Parser, Debug)]
#[command(name = "softraster", version)]
struct Cli {
    /// JSON config file; command-line values override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Window width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Window height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Window size as WxH (e.g. 1920x1080); wins over --width/--height.
    #[arg(long, short = 'r', value_parser = parse_resolution)]
    resolution: Option<(u32, u32)>,

    /// Disable VSync for an uncapped frame rate.
    #[arg(long)]
    no_vsync: bool,

    /// Image to show scaled into the bottom-right corner.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Log at debug level.
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn render_config(&self) -> anyhow::Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => RenderConfig::load(path)
                .with_context(|| format!("load config '{}'", path.display()))?,
            None => RenderConfig::default(),
        };
        if let Some(w) = self.width {
            config.width = w;
        }
        if let Some(h) = self.height {
            config.height = h;
        }
        if let Some((w, h)) = self.resolution {
            config.width = w;
            config.height = h;
        }
        if self.no_vsync {
            config.vsync = false;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let config = cli.render_config()?;
    let (width, height) = (config.width, config.height);

    let (display, texture_creator) = SdlDisplay::open(&config)?;
    let backend = SdlBackend::new(display, &texture_creator, &config)?;
    let mut renderer = Renderer::new(backend);

    let image = match &cli.image {
        Some(path) => Some(renderer.load_image(path)?),
        None => None,
    };

    let mut sketch = Sketch::new();
    let mut help = HelpPanel::new(width as f32 / 3.0, height as f32 / 4.0);
    info!("press H for help");

    'main: loop {
        let events = renderer.backend_mut().poll_events();
        let mut screenshot = false;
        for event in route_events(events, &mut help) {
            if event == softraster::InputEvent::KeyDown(softraster::Key::Char('s')) {
                screenshot = true;
            } else if !sketch.handle(&event) {
                break 'main;
            }
        }

        let shot = renderer.frame(|frame| -> softraster::RasterResult<Option<Bitmap>> {
            frame.clear(Pixel::WHITE);
            if let Some(handle) = image {
                let (x0, y0) = ((width * 3 / 4) as i32, (height * 3 / 4) as i32);
                frame.draw_image_scaled(x0, y0, width as i32 - 1, height as i32 - 1, handle)?;
            }
            sketch.draw(frame);
            help.draw(frame);

            if screenshot {
                let surface = frame.surface();
                let pixels = (0..surface.height() as i32)
                    .flat_map(|y| (0..surface.width() as i32).map(move |x| (x, y)))
                    .filter_map(|(x, y)| surface.get(x, y))
                    .collect();
                return Bitmap::from_pixels(frame.width(), frame.height(), pixels).map(Some);
            }
            Ok(None)
        })??;
        renderer.present()?;

        if let Some(bitmap) = shot {
            match codec::write_image(&bitmap, "screenshot", SaveMode::Sequential) {
                Ok(path) => info!(path = %path.display(), "screenshot saved"),
                Err(e) => warn!("screenshot failed: {}", e),
            }
        }
    }

    info!("bye");
    Ok(())
}
