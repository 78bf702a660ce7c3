pub mod rfd;
