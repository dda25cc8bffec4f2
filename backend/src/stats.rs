use std::fmt;

/// Number of homomorphic operations evaluated by a [crate::Module] since
/// creation or the last [crate::Module::reset_op_counts].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpCounts {
    pub encrypt: usize,
    pub add: usize,
    pub sub: usize,
    pub add_plain: usize,
    pub multiply: usize,
    pub multiply_plain: usize,
    pub relinearize: usize,
    pub rotate: usize,
    pub rescale: usize,
}

impl fmt::Display for OpCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "enc={} add={} sub={} add_plain={} mul={} mul_plain={} relin={} rot={} rescale={}",
            self.encrypt,
            self.add,
            self.sub,
            self.add_plain,
            self.multiply,
            self.multiply_plain,
            self.relinearize,
            self.rotate,
            self.rescale
        )
    }
}
