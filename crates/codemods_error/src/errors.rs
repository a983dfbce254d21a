use crate::Error;

/// The errors of a run over many inputs.
///
/// [Errors] is never empty. You could only construct an `Errors` from an `Error`.
#[derive(Debug)]
pub struct Errors(Vec<Error>);

impl Errors {
  pub fn new(err: Error) -> Self {
    Self(vec![err])
  }

  pub fn push(&mut self, error: Error) {
    self.0.push(error);
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Error> {
    self.0.iter()
  }
}

impl From<Error> for Errors {
  fn from(error: Error) -> Self {
    Self::new(error)
  }
}
