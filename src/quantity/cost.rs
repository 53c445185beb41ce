quantity!(Cost, "€", "{:.2}");
