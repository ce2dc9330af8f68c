pub type Color = [f32;4];

/// Parse a hex string of 6 or 8 bytes into a color.
/// Format is rrggbbaa, where the aa is optional.
#[track_caller]
pub fn hex(color: &str) -> Color {
    let a = match color.len() {
        8 => u8::from_str_radix(&color[6..], 16).unwrap(),
        6 => 255,
        _ => panic!("color string must be 6 or 8 characters")
    };
    let r = u8::from_str_radix(&color[..2], 16).unwrap();
    let g = u8::from_str_radix(&color[2..4], 16).unwrap();
    let b = u8::from_str_radix(&color[4..6], 16).unwrap();
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0]
}

#[derive(Debug, Clone,Copy, PartialEq,Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    W,
    A,
    S,
    D,
    R,
    C,
    Backspace,
}

#[derive(Debug, Clone,Copy, PartialEq,Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Per-axis text anchoring. `Left` means top when used for the y axis.
#[derive(Debug, Clone,Copy, PartialEq,Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Text that is either borrowed for the whole program or created per-frame.
/// The engine caches layout of the static variant by pointer identity.
pub enum Text {
    Static(&'static str),
    Owned(String),
}

impl From<&'static str> for Text {
    fn from(s: &'static str) -> Text {
        Text::Static(s)
    }
}

impl From<String> for Text {
    fn from(s: String) -> Text {
        Text::Owned(s)
    }
}

/// What the backend can draw.
/// All coordinates are fractions of a square view area;
/// the backend letterboxes and scales them to the window.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line { color: Color,  width: f32,  area: [f32;4] },
    Rectangle { color: Color,  area: [f32;4] },
    Circle { color: Color,  center: [f32;2],  radius: f32 },
    StaticText { color: Color,  size: f32,  position: [f32;2],  center: [Align;2],  text: &'static str },
    DynamicText { color: Color,  size: f32,  position: [f32;2],  center: [Align;2],  text: String },
}

/// Buffer of shapes the game wants drawn this frame.
/// Filled in draw order by the game, drained by the backend.
#[derive(Default)]
pub struct Graphics {
    shapes: Vec<Shape>,
}

impl Graphics {
    pub fn line(&mut self,  color: Color,  width: f32,  area: [f32;4]) {
        self.shapes.push(Shape::Line { color, width, area });
    }
    pub fn rectangle(&mut self,  color: Color,  area: [f32;4]) {
        self.shapes.push(Shape::Rectangle { color, area });
    }
    pub fn circle(&mut self,  color: Color,  center: [f32;2],  radius: f32) {
        self.shapes.push(Shape::Circle { color, center, radius });
    }
    pub fn text<T: Into<Text>>(&mut self,
            color: Color,
            position: [f32;2],
            center: [Align;2],
            size: f32,
            text: T,
    ) {
        self.shapes.push(match text.into() {
            Text::Static(text) => Shape::StaticText { color, size, position, center, text },
            Text::Owned(text) => Shape::DynamicText { color, size, position, center, text },
        });
    }
    pub fn drain(&mut self) -> std::vec::Drain<'_, Shape> {
        self.shapes.drain(..)
    }
    pub fn len(&self) -> usize {
        self.shapes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

pub trait Game {
    fn render(&mut self,  gfx: &mut Graphics);
    fn update(&mut self,  dt: f32);
    fn key_press(&mut self,  key: Key);
    fn key_release(&mut self,  key: Key);
    fn mouse_move(&mut self,  pos: [f32; 2]);
    fn mouse_press(&mut self,  button: MouseButton);
}
