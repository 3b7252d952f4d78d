pub mod mock;

/// Path to the testdata directory.
pub const PATH_TESTDATA: &str = "./testdata";

/// Fixture directory of the Bonsai Fibonacci receipt, relative to [`PATH_TESTDATA`].
pub const DIR_BONSAI_FIBONACCI: &str = "fixtures/bonsai-fibonacci";
