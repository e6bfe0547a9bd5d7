mod capture;
mod engine;
mod resampler;
mod segmenter;
