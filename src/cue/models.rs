/// One recognised CUE sheet directive. Everything else is `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    File {
        filename: String,
        file_type: String,
    },
    Track {
        number: u32,
        mode: String,
    },
    Index {
        /// Two digit index number, compared as text ("00", "01").
        number: String,
        /// Position in frames relative to the start of the current FILE.
        position: u64,
    },
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueLine {
    pub number: usize,
    /// Line content with its terminator stripped.
    pub text: String,
    pub directive: Directive,
}

impl CueLine {
    pub fn is_file_or_index(&self) -> bool {
        matches!(
            self.directive,
            Directive::File { .. } | Directive::Index { .. }
        )
    }
}
