use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;
use tracing::{debug, info};

use crate::config::RenderConfig;
use crate::display::{Orientation, PresentBackend};
use crate::error::{RasterError, RasterResult};
use crate::input::{InputEvent, Key, MouseButtonKind};
use crate::pixel::Pixel;
use crate::util::{FrameTimer, DEFAULT_SAMPLE_COUNT};

/// An SDL window and its event pump.
pub struct SdlDisplay {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    width: u32,
    height: u32,
}

impl SdlDisplay {
    /// Open a window as described by `config`.
    /// The texture creator must outlive any backend built from this display.
    pub fn open(config: &RenderConfig) -> RasterResult<(Self, TextureCreator<WindowContext>)> {
        config.validate()?;
        let sdl_context = sdl2::init().map_err(RasterError::backend)?;
        let video_subsystem = sdl_context.video().map_err(RasterError::backend)?;

        let window = video_subsystem
            .window(&config.title, config.width, config.height)
            .position_centered()
            .build()
            .map_err(|e| RasterError::backend(e.to_string()))?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if config.vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder
            .build()
            .map_err(|e| RasterError::backend(e.to_string()))?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump().map_err(RasterError::backend)?;

        info!(width = config.width, height = config.height, vsync = config.vsync, "opened window");
        Ok((
            Self {
                canvas,
                event_pump,
                width: config.width,
                height: config.height,
            },
            texture_creator,
        ))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyDown(map_key(k))),
                Event::KeyUp {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyUp(map_key(k))),
                Event::MouseMotion { x, y, .. } => events.push(InputEvent::MouseMove { x, y }),
                Event::MouseButtonDown {
                    x, y, mouse_btn, ..
                } => {
                    if let Some(button) = map_mouse_button(mouse_btn) {
                        events.push(InputEvent::MouseDown { x, y, button });
                    }
                },
                Event::MouseButtonUp {
                    x, y, mouse_btn, ..
                } => {
                    if let Some(button) = map_mouse_button(mouse_btn) {
                        events.push(InputEvent::MouseUp { x, y, button });
                    }
                },
                _ => {},
            }
        }

        events
    }
}

/// Windowed backend: draws into a shadow buffer that is uploaded to a
/// streaming texture when the frame is released.
pub struct SdlBackend<'a> {
    display: SdlDisplay,
    texture: Texture<'a>,
    pixels: Vec<Pixel>,
    staging: Vec<u8>,
    orientation: Orientation,
    in_frame: bool,
    timer: FrameTimer,
}

impl<'a> SdlBackend<'a> {
    pub fn new(
        display: SdlDisplay,
        texture_creator: &'a TextureCreator<WindowContext>,
        config: &RenderConfig,
    ) -> RasterResult<Self> {
        let (width, height) = (display.width, display.height);
        // ABGR8888 is R, G, B, A in memory on little-endian hosts
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::ABGR8888, width, height)
            .map_err(|e| RasterError::backend(e.to_string()))?;
        let len = width as usize * height as usize;
        debug!(width, height, orientation = ?config.orientation, "created streaming texture");
        Ok(Self {
            display,
            texture,
            pixels: vec![Pixel::BLACK; len],
            staging: vec![0; len * 4],
            orientation: config.orientation,
            in_frame: false,
            timer: FrameTimer::new(DEFAULT_SAMPLE_COUNT, config.fps_report_interval()),
        })
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        self.display.poll_events()
    }

    /// Rolling-average frame rate
    pub fn avg_fps(&self) -> f32 {
        self.timer.avg_fps()
    }
}

impl PresentBackend for SdlBackend<'_> {
    fn size(&self) -> (u32, u32) {
        (self.display.width, self.display.height)
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn acquire_frame_buffer(&mut self) -> RasterResult<&mut [Pixel]> {
        if self.in_frame {
            return Err(RasterError::frame_state("frame buffer already acquired"));
        }
        self.in_frame = true;
        Ok(&mut self.pixels)
    }

    fn release_frame_buffer(&mut self) -> RasterResult<()> {
        if !self.in_frame {
            return Err(RasterError::frame_state("release without a matching acquire"));
        }
        self.in_frame = false;

        // The window is opaque; send premultiplied channels as-is, top row first
        let (width, height) = (self.display.width, self.display.height);
        let pitch = width as usize * 4;
        for (y, dst_row) in self.staging.chunks_exact_mut(pitch).enumerate() {
            let start = self.orientation.storage_row(y as u32, height) as usize * width as usize;
            let src_row = &self.pixels[start..start + width as usize];
            for (dst, p) in dst_row.chunks_exact_mut(4).zip(src_row) {
                dst.copy_from_slice(&p.to_premultiplied_array());
            }
        }
        self.texture
            .update(None, &self.staging, pitch)
            .map_err(|e| RasterError::backend(e.to_string()))
    }

    fn present(&mut self) -> RasterResult<()> {
        if self.in_frame {
            return Err(RasterError::frame_state("present while a frame is still open"));
        }
        self.display
            .canvas
            .copy(&self.texture, None, None)
            .map_err(RasterError::backend)?;
        self.display.canvas.present();

        self.timer.tick();
        if let Some(fps) = self.timer.report() {
            let (slowest, fastest) = self.timer.fps_range().unwrap_or_default();
            info!(
                "{:.1} fps (avg {:.1}, range {:.1}..{:.1})",
                fps,
                self.timer.avg_fps(),
                slowest,
                fastest
            );
        }
        Ok(())
    }
}

fn map_key(k: Keycode) -> Key {
    match k {
        Keycode::Escape => Key::Escape,
        Keycode::Space => Key::Space,
        Keycode::Return => Key::Return,
        Keycode::Backspace => Key::Backspace,
        Keycode::Tab => Key::Tab,
        Keycode::Left => Key::Left,
        Keycode::Right => Key::Right,
        Keycode::Up => Key::Up,
        Keycode::Down => Key::Down,
        _ => {
            let name = k.name();
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c.to_ascii_lowercase()),
                _ => Key::Unknown,
            }
        },
    }
}

fn map_mouse_button(btn: MouseButton) -> Option<MouseButtonKind> {
    match btn {
        MouseButton::Left => Some(MouseButtonKind::Left),
        MouseButton::Right => Some(MouseButtonKind::Right),
        MouseButton::Middle => Some(MouseButtonKind::Middle),
        _ => None,
    }
}
