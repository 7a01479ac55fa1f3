/// Collects every error found while expanding a macro, so they are all
/// reported at once.
#[derive(Debug, Default)]
pub struct Dump {
    errors: Option<syn::Error>,
}

impl Dump {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, error: syn::Error) {
        match self.errors.as_mut() {
            Some(stored) => stored.combine(error),
            None => self.errors = Some(error),
        }
    }

    pub fn into_result(self) -> syn::Result<()> {
        match self.errors {
            Some(errors) => Err(errors),
            None => Ok(()),
        }
    }
}
