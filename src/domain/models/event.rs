use tui_textarea::Input;

use super::GenerationUpdate;

pub enum Event {
    Generation {
        request_id: String,
        update: GenerationUpdate,
    },
    KeyboardCharInput(Input),
    KeyboardCTRLC(),
    KeyboardEnter(),
    KeyboardPaste(String),
    Notice(String),
    UIResize(),
    UIScrollDown(),
    UIScrollUp(),
    UIScrollPageDown(),
    UIScrollPageUp(),
    UITick(),
}
