pub mod rpkm;
