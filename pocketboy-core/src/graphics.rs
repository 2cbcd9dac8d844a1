use crate::ppu::{self, FrameBuffer};
use sdl2::pixels::{Color, PixelFormatEnum};
use sdl2::render::{Texture, TextureCreator, TextureValueError, WindowCanvas};
use sdl2::video::{Window, WindowContext};
use sdl2::IntegerOrSdlError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphicsError {
    #[error("error creating renderer: {source}")]
    CreateRenderer {
        #[from]
        source: IntegerOrSdlError,
    },
    #[error("error creating frame texture: {source}")]
    CreateTexture {
        #[from]
        source: TextureValueError,
    },
    #[error("error updating frame texture: {msg}")]
    Texture { msg: String },
    #[error("error copying frame texture to renderer: {msg}")]
    CopyToCanvas { msg: String },
}

// GB colors range from 0-3 with 0 being "white" and 3 being "black"
const GB_COLOR_TO_RGB: [[u8; 3]; 4] = [[255, 255, 255], [170, 170, 170], [85, 85, 85], [0, 0, 0]];

/// Create an SDL2 renderer from the given SDL2 window, with the display area initialized to
/// all white pixels.
pub fn create_renderer(window: Window) -> Result<WindowCanvas, GraphicsError> {
    let mut canvas = window.into_canvas().build()?;

    canvas.set_draw_color(Color::RGB(255, 255, 255));
    canvas.clear();
    canvas.present();

    Ok(canvas)
}

pub struct GbFrameTexture<'a>(Texture<'a>);

impl<'a> GbFrameTexture<'a> {
    pub fn create(
        texture_creator: &'a TextureCreator<WindowContext>,
    ) -> Result<Self, GraphicsError> {
        let texture = texture_creator.create_texture_streaming(
            PixelFormatEnum::RGB24,
            ppu::SCREEN_WIDTH.into(),
            ppu::SCREEN_HEIGHT.into(),
        )?;
        Ok(Self(texture))
    }
}

fn texture_updater(frame_buffer: &FrameBuffer) -> impl FnOnce(&mut [u8], usize) + '_ {
    move |pixels, pitch| {
        for (i, scanline) in frame_buffer.iter().enumerate() {
            for (j, gb_color) in scanline.iter().copied().enumerate() {
                let start = i * pitch + 3 * j;
                pixels[start..start + 3]
                    .copy_from_slice(&GB_COLOR_TO_RGB[usize::from(gb_color)]);
            }
        }
    }
}

/// Render the current frame to the SDL2 window, overwriting all previously displayed data.
/// The canvas scales the 160x144 texture up to the window size.
pub fn render_frame(
    frame_buffer: &FrameBuffer,
    canvas: &mut WindowCanvas,
    texture: &mut GbFrameTexture<'_>,
) -> Result<(), GraphicsError> {
    texture
        .0
        .with_lock(None, texture_updater(frame_buffer))
        .map_err(|msg| GraphicsError::Texture { msg })?;

    canvas.set_draw_color(Color::RGB(0, 0, 0));
    canvas.clear();
    canvas
        .copy(&texture.0, None, None)
        .map_err(|msg| GraphicsError::CopyToCanvas { msg })?;
    canvas.present();

    Ok(())
}
