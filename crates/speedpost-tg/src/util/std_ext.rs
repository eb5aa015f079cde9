use easy_ext::ext;

pub(crate) mod prelude {
    pub(crate) use super::ErrorExt as _;
}

#[ext(ErrorExt)]
pub(crate) impl<E> E
where
    E: std::error::Error + ?Sized,
{
    fn display_chain(&self) -> display_error_chain::DisplayErrorChain<&Self> {
        display_error_chain::DisplayErrorChain::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("failed to fetch the tracking page")]
    struct Outer(#[source] Inner);

    #[derive(Debug, thiserror::Error)]
    #[error("connection reset")]
    struct Inner;

    #[test]
    fn display_chain_includes_sources() {
        let err = Outer(Inner);
        let rendered = err.display_chain().to_string();

        assert!(rendered.starts_with("failed to fetch the tracking page"), "{rendered}");
        assert!(rendered.contains("connection reset"), "{rendered}");

        let dyn_err: &dyn std::error::Error = &err;
        assert_eq!(dyn_err.display_chain().to_string(), rendered);
    }
}
