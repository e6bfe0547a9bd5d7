mod capture;
mod normalizer;
