/// Per-person data record.
pub mod record;
/// Template, side and layer types.
pub mod template;
