pub mod catppuccin {
    use nu_ansi_term::Color;
    pub struct Macchiato;
    impl Macchiato {
        // Base colors
        pub const TEXT: Color = Color::Rgb(202, 211, 245);  // Text
        pub const SURFACE2: Color = Color::Rgb(91, 96, 120);  // Subtle dim

        // Accents
        pub const RED: Color = Color::Rgb(237, 135, 150);
        pub const GREEN: Color = Color::Rgb(166, 218, 149);
        pub const YELLOW: Color = Color::Rgb(238, 212, 159);
        pub const BLUE: Color = Color::Rgb(138, 173, 244);
        pub const MAUVE: Color = Color::Rgb(198, 160, 246);
        pub const PEACH: Color = Color::Rgb(245, 169, 127);
        pub const TEAL: Color = Color::Rgb(139, 213, 202);
        pub const SKY: Color = Color::Rgb(145, 215, 227);
    }
}
