pub mod sample_doc;
