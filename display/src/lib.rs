use anyhow::Result;
use sdl2::pixels::PixelFormatEnum;

use vip8::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use vip8::FrameBuffer;

/// # Display
/// An SDL2 window showing the 64x32 monochrome frame buffer, each pixel scaled up to a
/// `scale`-sized square. It only redraws when handed a new frame.
pub struct Display {
    canvas: sdl2::render::WindowCanvas,
}

impl Display {
    /// Creates a window bound to an sdl2 context.
    ///
    /// # Arguments
    /// * `sdl` an sdl2 context with which to draw
    /// * `scale` the size multiplier for each pixel
    pub fn new(sdl: &sdl2::Sdl, scale: u32) -> Result<Self> {
        let video_subsystem = sdl.video().map_err(anyhow::Error::msg)?;
        let window = video_subsystem
            .window(
                "vip8",
                DISPLAY_WIDTH as u32 * scale,
                DISPLAY_HEIGHT as u32 * scale,
            )
            .position_centered()
            .build()?;
        let canvas = window.into_canvas().build()?;

        Ok(Display { canvas })
    }

    /// Formats a FrameBuffer as concatenated rows of RGB24 pixels: white when lit,
    /// black otherwise.
    fn frame_to_sdl_texture(frame: &FrameBuffer) -> Vec<u8> {
        frame
            .iter()
            .flatten()
            .flat_map(|&lit| [if lit { 0xFF } else { 0x00 }; 3])
            .collect()
    }

    /// Uploads the FrameBuffer as a streaming texture and presents it.
    pub fn render(&mut self, frame: &FrameBuffer) -> Result<()> {
        let texture_creator = self.canvas.texture_creator();

        let mut texture = texture_creator.create_texture_streaming(
            PixelFormatEnum::RGB24,
            DISPLAY_WIDTH as u32,
            DISPLAY_HEIGHT as u32,
        )?;

        let pixels = Display::frame_to_sdl_texture(frame);
        texture
            .with_lock(None, |buffer: &mut [u8], pitch: usize| {
                // Rows may be padded past 3 bytes per pixel
                for (row, line) in pixels.chunks(DISPLAY_WIDTH * 3).enumerate() {
                    buffer[row * pitch..row * pitch + line.len()].copy_from_slice(line);
                }
            })
            .map_err(anyhow::Error::msg)?;

        self.canvas
            .copy(&texture, None, None)
            .map_err(anyhow::Error::msg)?;
        self.canvas.present();
        Ok(())
    }
}
