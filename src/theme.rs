use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub const THEMES: [Theme; 3] = [
  Theme {
    name: "cinema",
    bg: Color::Rgb(18, 18, 18),
    fg: Color::Rgb(230, 230, 230),
    accent: Color::Rgb(80, 200, 120),
    muted: Color::Rgb(136, 136, 136),
    border: Color::Rgb(60, 60, 60),
    highlight_fg: Color::Rgb(18, 18, 18),
    highlight_bg: Color::Rgb(80, 200, 120),
    stripe_bg: Color::Rgb(26, 26, 26),
    status: Color::Rgb(120, 180, 240),
    error: Color::Rgb(255, 64, 64),
    key_fg: Color::Rgb(18, 18, 18),
    key_bg: Color::Rgb(136, 136, 136),
  },
  Theme {
    name: "matinee",
    bg: Color::Rgb(250, 246, 238),
    fg: Color::Rgb(40, 36, 32),
    accent: Color::Rgb(153, 0, 0),
    muted: Color::Rgb(130, 120, 110),
    border: Color::Rgb(200, 190, 175),
    highlight_fg: Color::Rgb(250, 246, 238),
    highlight_bg: Color::Rgb(153, 0, 0),
    stripe_bg: Color::Rgb(242, 236, 224),
    status: Color::Rgb(30, 90, 150),
    error: Color::Rgb(200, 30, 30),
    key_fg: Color::Rgb(250, 246, 238),
    key_bg: Color::Rgb(130, 120, 110),
  },
  Theme {
    name: "terminal",
    bg: Color::Reset,
    fg: Color::Reset,
    accent: Color::Cyan,
    muted: Color::DarkGray,
    border: Color::DarkGray,
    highlight_fg: Color::Black,
    highlight_bg: Color::Cyan,
    stripe_bg: Color::Reset,
    status: Color::Blue,
    error: Color::Red,
    key_fg: Color::Black,
    key_bg: Color::Gray,
  },
];
