/// A newtype-able index into an [`IdxVec`](crate::index_vec::IdxVec).
pub trait Idx: 'static + Copy + Eq {
    fn new(idx: usize) -> Self;
    fn idx(&self) -> usize;
}
