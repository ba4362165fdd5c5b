mod walk;

pub(crate) use walk::{length, LineWalk};
