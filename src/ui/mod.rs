/// Terminal front end: drawing, animation, keyboard, gamepad and sound.

pub mod anim;
pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod sound;
