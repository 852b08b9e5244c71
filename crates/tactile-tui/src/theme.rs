use ratatui::style::Color;

/// Colors used by the marquee screen
#[derive(Debug, Clone)]
pub struct Theme {
    // Background colors
    pub bg0: Color,
    pub bg2: Color,

    // Foreground colors
    pub fg0: Color,
    pub grey1: Color,
    pub grey2: Color,

    // Semantic colors
    pub rail: Color,
    pub accent: Color,
    pub forward: Color,
    pub backward: Color,
}

impl Default for Theme {
    fn default() -> Self {
        // Black stage, white type, gruvbox accents
        Self {
            bg0: Color::Rgb(0x00, 0x00, 0x00),
            bg2: Color::Rgb(0x45, 0x40, 0x3d),
            fg0: Color::Rgb(0xd4, 0xbe, 0x98),
            grey1: Color::Rgb(0x92, 0x83, 0x74),
            grey2: Color::Rgb(0xa8, 0x99, 0x84),
            rail: Color::Rgb(0xff, 0xff, 0xff),
            accent: Color::Rgb(0x89, 0xb4, 0x82),
            forward: Color::Rgb(0xa9, 0xb6, 0x65),
            backward: Color::Rgb(0xe7, 0x8a, 0x4e),
        }
    }
}
