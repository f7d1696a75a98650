use image::RgbImage;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use tracing::debug;

/// Hands frames to the user. Side-effecting; the pipeline consumes no
/// return value beyond failure.
pub trait Renderer {
    fn show(&mut self, frame: &RgbImage) -> Result<(), DisplayError>;
    /// One-line readout of the pipeline state (mode, fps, skip cadence).
    fn set_status(&mut self, status: &str);
}

/// Non-blocking key polling, once per tick.
pub trait InputSource {
    /// The next recognized key press, if any. A closed window reports `q`.
    fn poll_key(&mut self) -> Option<char>;
}

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("window error: {0}")]
    Window(#[from] minifb::Error),
}

/// A minifb window acting as both renderer and input source.
///
/// The window opens lazily on the first frame, sized to it, and reopens if
/// the stream's resolution changes. The status line is carried in the
/// window title.
pub struct ViewerWindow {
    title: String,
    status: String,
    window: Option<Window>,
    size: (usize, usize),
    buffer: Vec<u32>,
}

impl ViewerWindow {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            status: String::new(),
            window: None,
            size: (0, 0),
            buffer: Vec::new(),
        }
    }

    fn full_title(&self) -> String {
        if self.status.is_empty() {
            self.title.clone()
        } else {
            format!("{} | {}", self.title, self.status)
        }
    }
}

impl Renderer for ViewerWindow {
    fn show(&mut self, frame: &RgbImage) -> Result<(), DisplayError> {
        let (w, h) = (frame.width() as usize, frame.height() as usize);
        if self.window.is_none() || self.size != (w, h) {
            debug!(w, h, "opening display window");
            self.window = Some(Window::new(
                &self.full_title(),
                w,
                h,
                WindowOptions::default(),
            )?);
            self.size = (w, h);
        }

        self.buffer.clear();
        self.buffer.reserve(w * h);
        for p in frame.pixels() {
            let [r, g, b] = p.0;
            self.buffer
                .push(u32::from(r) << 16 | u32::from(g) << 8 | u32::from(b));
        }
        if let Some(window) = self.window.as_mut() {
            window.update_with_buffer(&self.buffer, w, h)?;
        }
        Ok(())
    }

    fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
        let title = self.full_title();
        if let Some(window) = self.window.as_mut() {
            window.set_title(&title);
        }
    }
}

impl InputSource for ViewerWindow {
    fn poll_key(&mut self) -> Option<char> {
        let window = self.window.as_mut()?;
        if !window.is_open() {
            return Some('q');
        }
        window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .find_map(key_to_char)
    }
}

fn key_to_char(key: Key) -> Option<char> {
    match key {
        Key::Key1 | Key::NumPad1 => Some('1'),
        Key::Key2 | Key::NumPad2 => Some('2'),
        Key::Key3 | Key::NumPad3 => Some('3'),
        Key::Key4 | Key::NumPad4 => Some('4'),
        Key::Equal | Key::NumPadPlus => Some('+'),
        Key::Minus | Key::NumPadMinus => Some('-'),
        Key::Q | Key::Escape => Some('q'),
        _ => None,
    }
}
