pub mod gphoto2_shell;
