/// A byte region with free space on both ends.
///
/// Packet payloads are appended first and headers are then prepended
/// innermost-first, so each header can see the bytes it covers.
pub trait BufWtr {
    fn data_len(&self) -> usize;
    fn front_len(&self) -> usize;
    fn back_len(&self) -> usize;
    fn is_empty(&self) -> bool;
    fn data(&self) -> &[u8];
    fn data_mut(&mut self) -> &mut [u8];
    fn front_free_space(&mut self) -> &mut [u8];
    fn back_free_space(&mut self) -> &mut [u8];
    fn grow_front(&mut self, len: usize) -> Result<(), Error>;
    fn grow_back(&mut self, len: usize) -> Result<(), Error>;
    fn append(&mut self, n: &[u8]) -> Result<(), Error>;
    fn prepend(&mut self, n: &[u8]) -> Result<(), Error>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    NotEnoughSpace,
}
