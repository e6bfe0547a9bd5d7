mod audio;
mod dispatch;
mod voice;
