pub mod ocr_pipeline;
