//! Per-pixel and per-image maps run on rayon when the `parallel` feature is on,
//! and fall back to plain iterators with the same method names when it is off.

#[cfg(feature = "parallel")]
pub use rayon::prelude;

#[cfg(not(feature = "parallel"))]
pub mod prelude {
    pub use std::iter::Iterator as ParallelIterator;

    pub trait IntoParallelIterator: Sized {
        type Item;
        type Iter: Iterator<Item = Self::Item>;

        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I> IntoParallelIterator for I
    where
        I: IntoIterator,
    {
        type Item = I::Item;
        type Iter = I::IntoIter;

        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }

    pub trait IntoParallelRefIterator<'data> {
        type Item: 'data;
        type Iter: ParallelIterator<Item = Self::Item>;

        fn par_iter(&'data self) -> Self::Iter;
    }

    impl<'data, I: 'data + ?Sized> IntoParallelRefIterator<'data> for I
    where
        &'data I: IntoParallelIterator,
    {
        type Iter = <&'data I as IntoParallelIterator>::Iter;
        type Item = <&'data I as IntoParallelIterator>::Item;

        fn par_iter(&'data self) -> Self::Iter {
            self.into_par_iter()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_map_preserves_order(){
        let filenames = vec!["a.png", "b.png", "c.png"];
        let lengths: Vec<usize> = filenames.par_iter().map(|name| name.len()).collect();
        assert_eq!(lengths, vec![5, 5, 5]);

        let upper: Vec<String> = filenames.into_par_iter().map(|name| name.to_uppercase()).collect();
        assert_eq!(upper, vec!["A.PNG", "B.PNG", "C.PNG"]);
    }
}
