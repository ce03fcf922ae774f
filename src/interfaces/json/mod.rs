pub mod line_writer;
